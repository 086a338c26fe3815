//! Tabbed rich-text editing core: a run-based document model, a keyword
//! highlighter that recolors the document after every change, a find and
//! replace engine, and the terminal renderer used by the `jtype` binary.

pub mod config;
pub mod document;
pub mod editor;
pub mod file;
pub mod find;
pub mod highlight;
pub mod render;
pub mod theme;
pub mod workspace;
