//! Image processing in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image` crate, `reqwest` for remote sources |
//! | **Resize** | Lanczos3 fit-inside (`WxH`) |
//! | **Cover** | fill-resize + center crop (`WxH^` + extent) |
//! | **Composite** | `imageops::overlay`, luminance masks, stroked borders |
//! | **Text** | `rusttype` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math and card layout (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions turning cards into composition plans

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use operations::{
    CardAssets, branding_background, plan_centered_logo, plan_social_card, square_resize,
};
pub use params::{
    Background, Border, Color, CompositionPlan, Fit, ImageLayer, ImageSource, InvalidColor,
    Position, ResizeParams, TextAnchor, TextLayer,
};
pub use rust_backend::RustBackend;
