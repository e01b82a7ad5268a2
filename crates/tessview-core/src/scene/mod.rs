mod figure;
mod layout;
mod raster;

pub use figure::{Artist, ArtistId, ArtistKind, Axes, AxesId, Figure, Rect};
pub use layout::{fill_within, fit_within, GridSpec};
