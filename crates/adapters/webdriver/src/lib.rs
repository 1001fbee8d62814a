//! # leadrouter-adapter-webdriver
//!
//! Drives the Gravity Forms admin console through a W3C WebDriver server
//! (chromedriver) and exposes it as a [`FormSurface`](leadrouter_app::ports::FormSurface).
//!
//! ## Layout
//! - [`session`]: thin JSON client for the WebDriver HTTP protocol
//! - [`locator`]: element locators and ordered fallback chains
//! - [`wait`]: bounded polling for elements and page loads
//! - [`console`]: the console pages, controls and scripts
//!
//! Driver failures are mapped onto [`SurfaceError`](leadrouter_domain::error::SurfaceError):
//! a lost session is fatal, a missing control is scoped to the step that
//! needed it.

pub mod config;
pub mod console;
pub mod error;
pub mod locator;
pub mod session;
pub mod wait;

pub use config::WebDriverConfig;
pub use console::GravityFormsConsole;
pub use error::WebDriverError;
pub use session::Session;
