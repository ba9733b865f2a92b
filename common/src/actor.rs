//! Minimal actor runtime used to give the lobby service a single owning
//! task over its transient session/room/invitation state, instead of a
//! mutex shared across every connection handler. Adapted from the hand
//! rolled actor pattern this codebase otherwise uses for in-process
//! message passing (no external actor-framework dependency).

use tokio::sync::{mpsc, oneshot};

pub trait Actor: Sized + Send + 'static {
    fn id(&self) -> u32;

    fn started(&mut self, _ctx: &mut ActorContext<Self>) {}

    fn create<F>(action: F, id: u32) -> Addr<Self>
    where
        F: FnOnce(&mut ActorContext<Self>) -> Self,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let addr = Addr { tx, id };
        let mut ctx = ActorContext {
            rx,
            addr: addr.clone(),
        };
        let this = action(&mut ctx);
        this.spawn(ctx);
        addr
    }

    fn start(self) -> Addr<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let addr = Addr {
            tx,
            id: self.id(),
        };
        let ctx = ActorContext {
            rx,
            addr: addr.clone(),
        };
        self.spawn(ctx);
        addr
    }

    fn spawn(self, mut ctx: ActorContext<Self>) {
        tokio::spawn(async move {
            let mut this = self;
            this.started(&mut ctx);
            ctx.process(&mut this).await;
            this.stopping();
        });
    }

    fn stopping(&mut self) {}
}

pub trait Message: Send + 'static {
    type Result: Send + 'static;
}

pub trait Handler<M: Message>: Actor {
    fn handle(&mut self, msg: M, ctx: &mut ActorContext<Self>) -> M::Result;
}

pub struct ActorContext<A: Actor> {
    rx: mpsc::UnboundedReceiver<Box<dyn EnvelopeProxy<A>>>,
    addr: Addr<A>,
}

struct StopMessage;

impl Message for StopMessage {
    type Result = ();
}

impl<A> EnvelopeProxy<A> for StopMessage
where
    A: Actor,
{
    fn handle(self: Box<Self>, _actor: &mut A, _ctx: &mut ActorContext<A>) -> Action {
        Action::Stop
    }
}

enum Action {
    Continue,
    Stop,
}

impl<A> ActorContext<A>
where
    A: Actor,
{
    async fn process(&mut self, actor: &mut A) {
        while let Some(msg) = self.rx.recv().await {
            match msg.handle(actor, self) {
                Action::Stop => break,
                Action::Continue => continue,
            }
        }
    }

    pub fn addr(&mut self) -> Addr<A> {
        self.addr.clone()
    }
}

/// Handle used to send messages to an actor's owning task.
pub struct Addr<A: Actor> {
    pub id: u32,
    tx: mpsc::UnboundedSender<Box<dyn EnvelopeProxy<A>>>,
}

impl<A> Clone for Addr<A>
where
    A: Actor,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            tx: self.tx.clone(),
        }
    }
}

#[derive(Debug)]
pub enum AddrError {
    Send,
    Recv,
}

impl<A> Addr<A>
where
    A: Actor,
{
    /// Sends `msg` and awaits the actor's response.
    pub async fn send<M, R>(&self, msg: M) -> Result<R, AddrError>
    where
        A: Handler<M>,
        M: Message<Result = R>,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(Box::new(Envelope { msg, tx })).is_err() {
            return Err(AddrError::Send);
        }
        rx.await.map_err(|_| AddrError::Recv)
    }

    /// Sends `msg` without waiting for a response.
    pub fn do_send<M>(&self, msg: M) -> bool
    where
        A: Handler<M>,
        M: Message,
    {
        self.tx.send(Box::new(DiscardEnvelope { msg })).is_ok()
    }

    pub fn stop(&self) {
        self.tx.send(Box::new(StopMessage)).ok();
    }
}

trait EnvelopeProxy<A: Actor>: Send {
    fn handle(self: Box<Self>, actor: &mut A, ctx: &mut ActorContext<A>) -> Action;
}

struct Envelope<M, R> {
    msg: M,
    tx: oneshot::Sender<R>,
}

impl<A, M, R> EnvelopeProxy<A> for Envelope<M, R>
where
    A: Actor + Handler<M>,
    M: Message<Result = R>,
    R: Send + 'static,
{
    fn handle(self: Box<Self>, actor: &mut A, ctx: &mut ActorContext<A>) -> Action {
        let result = actor.handle(self.msg, ctx);
        self.tx.send(result).ok();
        Action::Continue
    }
}

struct DiscardEnvelope<M> {
    msg: M,
}

impl<A, M> EnvelopeProxy<A> for DiscardEnvelope<M>
where
    A: Actor + Handler<M>,
    M: Message,
{
    fn handle(self: Box<Self>, actor: &mut A, ctx: &mut ActorContext<A>) -> Action {
        actor.handle(self.msg, ctx);
        Action::Continue
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Counter {
        value: u32,
    }

    impl Actor for Counter {
        fn id(&self) -> u32 {
            0
        }
    }

    struct Increment(u32);

    impl Message for Increment {
        type Result = u32;
    }

    impl Handler<Increment> for Counter {
        fn handle(&mut self, msg: Increment, _ctx: &mut ActorContext<Self>) -> u32 {
            self.value += msg.0;
            self.value
        }
    }

    /// Sending a message to an actor and awaiting its reply returns the
    /// value produced by the handler, and state mutations are visible to
    /// subsequent sends since only the owning task ever touches `value`.
    #[tokio::test]
    async fn test_send_roundtrip() {
        let addr = Counter { value: 0 }.start();
        let first = addr.send(Increment(5)).await.unwrap();
        assert_eq!(first, 5);
        let second = addr.send(Increment(3)).await.unwrap();
        assert_eq!(second, 8);
    }
}
