pub(crate) mod bitmap;
pub(crate) mod display_item;
pub(crate) mod view_state;
