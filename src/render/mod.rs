//! Renderer dispatch: the boundary between documents and visual output.

mod core;

pub use self::core::{
    RenderContext, RenderDispatch, RenderedSection, ResolvedBlock, SectionRenderer,
};
