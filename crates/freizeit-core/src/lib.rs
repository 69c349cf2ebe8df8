//! Kerntypen für freizeit: Aktivitätskatalog, Wetter-Snapshot und
//! Sitzungszustand.
//!
//! Dieses Crate enthält keine I/O-Logik außer dem zeilenweisen Einlesen
//! der Katalog-Pools; Netzwerkzugriffe und Persistenz-Pfade gehören in
//! die CLI.

pub mod activity;
pub mod session;
pub mod weather;

pub use activity::{Activity, Catalogue, CatalogueError};
pub use session::{SessionError, SessionState};
pub use weather::{GoodWeatherPolicy, WeatherSnapshot};
