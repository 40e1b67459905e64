mod cpanel_host;
mod cpanel_password;
mod cpanel_port;
mod cpanel_username;
pub mod serde_helpers;

pub use cpanel_host::CpanelHost;
pub use cpanel_password::CpanelPassword;
pub use cpanel_port::CpanelPort;
pub use cpanel_username::CpanelUsername;

