//! The lobby's transient state: online sessions, room membership,
//! invitations and live game servers. Owned exclusively by one
//! `LobbyActor` task (see `gamecore_common::actor`) so connection handlers
//! never contend on a shared lock across an `.await` point — every
//! mutation here is a plain synchronous hash-map operation.

use gamecore_common::actor::{Actor, ActorContext, Handler, Message};
use gamecore_common::port;
use gamecore_protocol::entities::Id;
use std::collections::{HashMap, HashSet};

use crate::error::LobbyError;

#[derive(Debug, Clone)]
pub struct Invitation {
    pub room_id: Id,
    pub from_user_id: Id,
}

#[derive(Default)]
pub struct LobbyActor {
    online_users: HashSet<Id>,
    conn_of_user: HashMap<Id, u64>,
    user_of_conn: HashMap<u64, Id>,
    room_members: HashMap<Id, HashSet<Id>>,
    invitations: HashMap<Id, Vec<Invitation>>,
    game_servers: HashMap<Id, u16>,
    used_ports: HashSet<u16>,
}

impl Actor for LobbyActor {
    fn id(&self) -> u32 {
        0
    }
}

macro_rules! message {
    ($name:ident { $($field:ident: $ty:ty),* $(,)? } -> $result:ty) => {
        pub struct $name { $(pub $field: $ty),* }
        impl Message for $name {
            type Result = $result;
        }
    };
}

message!(RegisterSession { user_id: Id, conn_id: u64 } -> Result<(), LobbyError>);
message!(MarkOffline { conn_id: u64 } -> Option<Id>);
message!(IsOnline { user_id: Id } -> bool);
message!(ListOnlineUsers {} -> Vec<Id>);

message!(JoinRoom { room_id: Id, user_id: Id, max_players: u32 } -> Result<usize, LobbyError>);
message!(LeaveRoom { room_id: Id, user_id: Id } -> ());
message!(RoomMembers { room_id: Id } -> HashSet<Id>);
message!(PurgeRoom { room_id: Id } -> ());
message!(PurgeAllRooms {} -> ());

message!(AddInvitation { target_user_id: Id, room_id: Id, from_user_id: Id } -> Result<(), LobbyError>);
message!(ListInvitations { user_id: Id } -> Vec<Invitation>);
message!(TakeInvitation { user_id: Id, room_id: Id } -> Result<Invitation, LobbyError>);

message!(AllocateGameServer { room_id: Id } -> Result<u16, LobbyError>);
message!(ReleaseGameServer { room_id: Id } -> Option<u16>);
message!(GameServerPort { room_id: Id } -> Option<u16>);

impl Handler<RegisterSession> for LobbyActor {
    fn handle(&mut self, msg: RegisterSession, _ctx: &mut ActorContext<Self>) -> Result<(), LobbyError> {
        if self.online_users.contains(&msg.user_id) {
            return Err(LobbyError::AlreadyLoggedIn);
        }
        self.online_users.insert(msg.user_id);
        self.conn_of_user.insert(msg.user_id, msg.conn_id);
        self.user_of_conn.insert(msg.conn_id, msg.user_id);
        Ok(())
    }
}

impl Handler<MarkOffline> for LobbyActor {
    fn handle(&mut self, msg: MarkOffline, _ctx: &mut ActorContext<Self>) -> Option<Id> {
        let user_id = self.user_of_conn.remove(&msg.conn_id)?;
        self.online_users.remove(&user_id);
        self.conn_of_user.remove(&user_id);
        self.invitations.remove(&user_id);
        for members in self.room_members.values_mut() {
            members.remove(&user_id);
        }
        Some(user_id)
    }
}

impl Handler<IsOnline> for LobbyActor {
    fn handle(&mut self, msg: IsOnline, _ctx: &mut ActorContext<Self>) -> bool {
        self.online_users.contains(&msg.user_id)
    }
}

impl Handler<ListOnlineUsers> for LobbyActor {
    fn handle(&mut self, _msg: ListOnlineUsers, _ctx: &mut ActorContext<Self>) -> Vec<Id> {
        self.online_users.iter().copied().collect()
    }
}

impl Handler<JoinRoom> for LobbyActor {
    fn handle(&mut self, msg: JoinRoom, _ctx: &mut ActorContext<Self>) -> Result<usize, LobbyError> {
        let members = self.room_members.entry(msg.room_id).or_default();
        if members.contains(&msg.user_id) {
            return Ok(members.len());
        }
        if members.len() as u32 >= msg.max_players {
            return Err(LobbyError::RoomFull);
        }
        members.insert(msg.user_id);
        Ok(members.len())
    }
}

impl Handler<LeaveRoom> for LobbyActor {
    fn handle(&mut self, msg: LeaveRoom, _ctx: &mut ActorContext<Self>) {
        if let Some(members) = self.room_members.get_mut(&msg.room_id) {
            members.remove(&msg.user_id);
        }
    }
}

impl Handler<RoomMembers> for LobbyActor {
    fn handle(&mut self, msg: RoomMembers, _ctx: &mut ActorContext<Self>) -> HashSet<Id> {
        self.room_members.get(&msg.room_id).cloned().unwrap_or_default()
    }
}

impl Handler<PurgeRoom> for LobbyActor {
    fn handle(&mut self, msg: PurgeRoom, _ctx: &mut ActorContext<Self>) {
        self.room_members.remove(&msg.room_id);
        if let Some(port) = self.game_servers.remove(&msg.room_id) {
            self.used_ports.remove(&port);
        }
    }
}

impl Handler<PurgeAllRooms> for LobbyActor {
    fn handle(&mut self, _msg: PurgeAllRooms, _ctx: &mut ActorContext<Self>) {
        self.room_members.clear();
        self.game_servers.clear();
        self.used_ports.clear();
    }
}

impl Handler<AddInvitation> for LobbyActor {
    fn handle(&mut self, msg: AddInvitation, _ctx: &mut ActorContext<Self>) -> Result<(), LobbyError> {
        let existing = self.invitations.entry(msg.target_user_id).or_default();
        if existing.iter().any(|i| i.room_id == msg.room_id) {
            return Err(LobbyError::DuplicateInvitation);
        }
        existing.push(Invitation {
            room_id: msg.room_id,
            from_user_id: msg.from_user_id,
        });
        Ok(())
    }
}

impl Handler<ListInvitations> for LobbyActor {
    fn handle(&mut self, msg: ListInvitations, _ctx: &mut ActorContext<Self>) -> Vec<Invitation> {
        self.invitations.get(&msg.user_id).cloned().unwrap_or_default()
    }
}

impl Handler<TakeInvitation> for LobbyActor {
    fn handle(&mut self, msg: TakeInvitation, _ctx: &mut ActorContext<Self>) -> Result<Invitation, LobbyError> {
        let list = self.invitations.get_mut(&msg.user_id).ok_or(LobbyError::NoInvitation)?;
        let pos = list
            .iter()
            .position(|i| i.room_id == msg.room_id)
            .ok_or(LobbyError::NoInvitation)?;
        Ok(list.remove(pos))
    }
}

impl Handler<AllocateGameServer> for LobbyActor {
    fn handle(&mut self, msg: AllocateGameServer, _ctx: &mut ActorContext<Self>) -> Result<u16, LobbyError> {
        let port = port::allocate_port(&self.used_ports).map_err(|_| LobbyError::NoFreePort)?;
        self.used_ports.insert(port);
        self.game_servers.insert(msg.room_id, port);
        Ok(port)
    }
}

impl Handler<ReleaseGameServer> for LobbyActor {
    fn handle(&mut self, msg: ReleaseGameServer, _ctx: &mut ActorContext<Self>) -> Option<u16> {
        let port = self.game_servers.remove(&msg.room_id)?;
        self.used_ports.remove(&port);
        Some(port)
    }
}

impl Handler<GameServerPort> for LobbyActor {
    fn handle(&mut self, msg: GameServerPort, _ctx: &mut ActorContext<Self>) -> Option<u16> {
        self.game_servers.get(&msg.room_id).copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Logging the same user in twice from different connections without
    /// an intervening logout is rejected.
    #[tokio::test]
    async fn test_duplicate_login_rejected() {
        let addr = LobbyActor::default().start();
        addr.send(RegisterSession { user_id: 1, conn_id: 1 }).await.unwrap().unwrap();
        let err = addr
            .send(RegisterSession { user_id: 1, conn_id: 2 })
            .await
            .unwrap();
        assert!(matches!(err, Err(LobbyError::AlreadyLoggedIn)));
    }

    /// Disconnecting clears the online flag and any pending invitations.
    #[tokio::test]
    async fn test_disconnect_clears_state() {
        let addr = LobbyActor::default().start();
        addr.send(RegisterSession { user_id: 1, conn_id: 1 }).await.unwrap().unwrap();
        addr.send(AddInvitation { target_user_id: 1, room_id: 5, from_user_id: 2 })
            .await
            .unwrap()
            .unwrap();
        addr.send(JoinRoom { room_id: 5, user_id: 1, max_players: 4 }).await.unwrap().unwrap();

        let disconnected = addr.send(MarkOffline { conn_id: 1 }).await.unwrap();
        assert_eq!(disconnected, Some(1));

        let online = addr.send(IsOnline { user_id: 1 }).await.unwrap();
        assert!(!online);

        let invites = addr.send(ListInvitations { user_id: 1 }).await.unwrap();
        assert!(invites.is_empty());

        let members = addr.send(RoomMembers { room_id: 5 }).await.unwrap();
        assert!(!members.contains(&1));
    }

    /// A room fills up to `max_players` and rejects further joins.
    #[tokio::test]
    async fn test_room_capacity() {
        let addr = LobbyActor::default().start();
        addr.send(JoinRoom { room_id: 1, user_id: 1, max_players: 2 }).await.unwrap().unwrap();
        addr.send(JoinRoom { room_id: 1, user_id: 2, max_players: 2 }).await.unwrap().unwrap();
        let err = addr
            .send(JoinRoom { room_id: 1, user_id: 3, max_players: 2 })
            .await
            .unwrap();
        assert!(matches!(err, Err(LobbyError::RoomFull)));
    }
}
