mod text;

pub use text::render_text;
