pub mod mode_header;
pub mod search_screen;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use mode_header::{ModeHeader, ModeHeaderProps, SPINNER};
pub use search_screen::{SearchScreen, SearchScreenProps};
