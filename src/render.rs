pub(crate) mod animated;
pub(crate) mod checkerboard;
pub(crate) mod multi_page;
pub(crate) mod offscreen;
pub(crate) mod renderer;
pub(crate) mod session;
pub(crate) mod single_flight;
pub(crate) mod static_image;
