//! Service layer for direct messaging.

mod identity;
mod log;
mod messaging;
mod paging;
mod policy;
mod summary;

pub use identity::ConversationIdentityIndex;
pub use log::MessageLog;
pub use messaging::{
    MessageService, MessageServiceError, MessageServiceResult, SendMessageRequest,
};
pub use policy::StoreCallPolicy;
pub use summary::ConversationSummaries;
