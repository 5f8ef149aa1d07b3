//! # Channel Client
//!
//! An [`OrderQuery`] that forwards every request over a Tokio mpsc channel and waits
//! for the answer on a oneshot responder. Whoever owns the receiving end plays the
//! backend: the mock layer, a test driving responses by hand, or an in-process bridge.

use crate::clients::{OrderQuery, QueryError, TrackTarget};
use crate::model::{Order, UserId};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// One-shot response channel for a single request.
pub type Responder<T> = oneshot::Sender<Result<T, QueryError>>;

/// Requests understood by the receiving end of a [`ChannelQuery`].
#[derive(Debug)]
pub enum QueryRequest {
    Fetch {
        target: TrackTarget,
        respond_to: Responder<Order>,
    },
    OrdersForUser {
        user_id: UserId,
        respond_to: Responder<Vec<Order>>,
    },
}

/// Cheap to clone; holds only the sender.
#[derive(Clone, Debug)]
pub struct ChannelQuery {
    sender: mpsc::Sender<QueryRequest>,
}

impl ChannelQuery {
    pub fn new(sender: mpsc::Sender<QueryRequest>) -> Self {
        Self { sender }
    }

    async fn request<T: Send>(
        &self,
        build: impl FnOnce(Responder<T>) -> QueryRequest + Send,
    ) -> Result<T, QueryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| QueryError::Transport("query channel closed".to_string()))?;
        response
            .await
            .map_err(|_| QueryError::Transport("query responder dropped".to_string()))?
    }
}

#[async_trait]
impl OrderQuery for ChannelQuery {
    async fn fetch(&self, target: &TrackTarget) -> Result<Order, QueryError> {
        let target = target.clone();
        self.request(|respond_to| QueryRequest::Fetch { target, respond_to })
            .await
    }

    async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, QueryError> {
        let user_id = user_id.clone();
        self.request(|respond_to| QueryRequest::OrdersForUser {
            user_id,
            respond_to,
        })
        .await
    }
}
