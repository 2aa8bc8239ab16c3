mod details;
mod filters;
mod overlays;
mod panels;
