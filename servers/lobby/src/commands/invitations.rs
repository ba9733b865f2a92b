use serde_json::{json, Value};

use super::{require_authenticated, require_id};
use crate::error::LobbyError;
use crate::session::{ConnState, LobbyContext};
use crate::state::{AddInvitation, IsOnline, ListInvitations, TakeInvitation};

pub async fn invite_user(ctx: &LobbyContext, conn: &mut ConnState, request: &Value) -> Result<Value, LobbyError> {
    let user_id = require_authenticated(conn)?;
    let room_id = require_id(request, "roomId")?;
    let target_user_id = require_id(request, "targetUserId")?;

    if target_user_id == user_id {
        return Err(LobbyError::DataStore("cannot invite yourself".to_string()));
    }

    let room = ctx.ds.get_room(room_id).await.map_err(|_| LobbyError::RoomNotFound)?;
    if room.host_user_id != user_id {
        return Err(LobbyError::NotHost);
    }

    let online = ctx
        .actor
        .send(IsOnline { user_id: target_user_id })
        .await
        .unwrap_or(false);
    if !online {
        return Err(LobbyError::UserOffline);
    }

    ctx.actor
        .send(AddInvitation {
            target_user_id,
            room_id,
            from_user_id: user_id,
        })
        .await
        .map_err(|_| LobbyError::DataStore("lobby actor unavailable".to_string()))??;

    let mut invite_list = room.invite_list.clone();
    invite_list.push(target_user_id);
    ctx.ds.update_room_invite_list(room_id, &invite_list).await?;

    Ok(json!({ "roomId": room_id, "targetUserId": target_user_id }))
}

pub async fn list_invitations(ctx: &LobbyContext, conn: &mut ConnState) -> Result<Value, LobbyError> {
    let user_id = require_authenticated(conn)?;
    let invitations = ctx
        .actor
        .send(ListInvitations { user_id })
        .await
        .unwrap_or_default();

    let mut out = Vec::with_capacity(invitations.len());
    for invitation in invitations {
        let room = ctx.ds.get_room(invitation.room_id).await.ok();
        let from = ctx.ds.get_user(invitation.from_user_id).await.ok();
        out.push(json!({
            "roomId": invitation.room_id,
            "roomName": room.map(|r| r.name),
            "fromUsername": from.map(|u| u.name),
        }));
    }
    Ok(json!({ "invitations": out }))
}

pub async fn accept_invitation(ctx: &LobbyContext, conn: &mut ConnState, request: &Value) -> Result<Value, LobbyError> {
    let user_id = require_authenticated(conn)?;
    let room_id = require_id(request, "roomId")?;

    ctx.actor
        .send(TakeInvitation { user_id, room_id })
        .await
        .map_err(|_| LobbyError::DataStore("lobby actor unavailable".to_string()))??;

    super::rooms::join_room(ctx, conn, request, true).await
}
