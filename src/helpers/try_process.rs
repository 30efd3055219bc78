use crate::{PCollection, RFBound};
use std::fmt::Display;

impl<T: RFBound> PCollection<T> {
    /// Apply a fallible per-element transform, logging and dropping failures.
    ///
    /// A failing element never affects its neighbours in the same shard. `stage`
    /// names the transform in the emitted warning.
    pub fn try_map_or_drop<O, E, F>(self, stage: &'static str, f: F) -> PCollection<O>
    where
        O: RFBound,
        E: Display,
        F: 'static + Send + Sync + Fn(&T) -> Result<O, E>,
    {
        self.flat_map(move |t| match f(t) {
            Ok(o) => vec![o],
            Err(e) => {
                tracing::warn!(stage, error = %e, "dropping element");
                Vec::new()
            }
        })
    }
}
