//! Adapters for the external collaborators: route network providers, the
//! reference extent table and the input table.

pub mod arcgis;
pub mod extent;
pub mod geojson;
pub mod records;

pub use arcgis::ArcGisLayer;
pub use extent::{load_extents, read_extents};
pub use self::geojson::{feature_collection_from_value, parse_feature_collection, read_network_file};
pub use records::{read_records, read_records_file, RecordColumns};
