pub mod filters_route;
