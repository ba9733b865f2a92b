//! Routes a `DsRequest` to the matching `Store` method. This is the data
//! store service's entire business logic surface; the server binary only
//! adds the network loop around it.

use gamecore_protocol::ds::{Collection, DsRequest, DsResponse};

use crate::store::Store;

pub fn handle(store: &Store, request: DsRequest) -> DsResponse {
    let result = match (request.collection, request.action.as_str()) {
        (Collection::User, "create") => store.create_user(request.data),
        (Collection::User, "read") => store.read_user(request.data),
        (Collection::User, "update") => store.update_user(request.data),
        (Collection::User, "query") => store.query_users(request.data),

        (Collection::Developer, "create") => store.create_developer(request.data),
        (Collection::Developer, "read") => store.read_developer(request.data),
        (Collection::Developer, "update") => store.update_developer(request.data),
        (Collection::Developer, "query") => store.query_developers(request.data),

        (Collection::Game, "create") => store.create_game(request.data),
        (Collection::Game, "read") => store.read_game(request.data),
        (Collection::Game, "update") => store.update_game(request.data),
        (Collection::Game, "query") => store.query_games(request.data),
        (Collection::Game, "add_rating") => store.add_rating(request.data),
        (Collection::Game, "delete") => store.delete_game(request.data),

        (Collection::Room, "create") => store.create_room(request.data),
        (Collection::Room, "read") => store.read_room(request.data),
        (Collection::Room, "update") => store.update_room(request.data),
        (Collection::Room, "delete") => store.delete_room(request.data),
        (Collection::Room, "query") => store.query_rooms(request.data),

        (Collection::GameLog, "create") => store.create_gamelog(request.data),
        (Collection::GameLog, "read") => store.read_gamelog(request.data),
        (Collection::GameLog, "update") => store.update_gamelog(request.data),
        (Collection::GameLog, "query") => store.query_gamelogs(request.data),

        (collection, action) => {
            return DsResponse::error(format!(
                "unsupported action '{action}' for collection {collection:?}"
            ))
        }
    };

    match result {
        Ok(body) => DsResponse::success(body),
        Err(err) => DsResponse::error(err.message()),
    }
}
