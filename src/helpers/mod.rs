pub(crate) mod keyed;
pub(crate) mod try_process;
