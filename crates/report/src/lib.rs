pub mod chart;
pub mod export;
pub mod format;
pub mod text;

pub use chart::write_chart_svg;
pub use format::PriceFormat;
pub use text::{Report, render_text};
