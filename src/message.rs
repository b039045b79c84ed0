use crate::core::roster::FetchTicket;
use crate::core::user::{Snapshot, User, UserId};
use crate::fl;
use crate::service::{CreateError, Created, FetchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Users,
    Settings,
}

impl Page {
    pub const ALL: &'static [Page] = &[Page::Users, Page::Settings];

    pub fn title(&self) -> String {
        match self {
            Self::Users => fl!("page-users"),
            Self::Settings => fl!("page-settings"),
        }
    }

    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Users => "system-users-symbolic",
            Self::Settings => "emblem-system-symbolic",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    // Add-user form
    UsernameChanged(String),
    EmailChanged(String),
    Submit,
    UserCreated(Result<Created, CreateError>),
    DismissFeedback,

    // User list
    Refresh,
    UsersFetched(FetchTicket, Result<Snapshot, FetchError>),

    // Inspector drawer
    InspectUser(UserId),
    UserInspected(UserId, Result<User, FetchError>),
    CloseInspector,

    // Settings
    OpenSettings,
    SetServiceUrl(String),
    SetRequestTimeout(String),
    TestServiceConnection,
    ServiceConnectionTested(Result<String, String>),
    ToggleDebugLogging,
}
