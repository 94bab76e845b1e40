//! Frame renderers: the backend contract, the DOM-driven and raster realizations, and the
//! startup negotiation that picks between them.
pub(crate) mod backend;
pub(crate) mod dom;
pub(crate) mod negotiate;
pub(crate) mod raster;
