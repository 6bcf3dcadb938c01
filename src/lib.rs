pub mod config;
pub mod error;
pub mod message;
pub mod services;
pub mod state;
pub mod widget;

pub use config::{UserIdPlacement, WidgetConfig};
pub use error::{ConfigError, ReplyError, ReplyErrorKind, WidgetError};
pub use message::{ChatMessage, Sender};
pub use services::render::{Line, RenderOp, View, diff, render};
pub use state::{Phase, Session};
pub use widget::ChatWidget;
