pub(crate) mod adapter;
pub(crate) mod batch;
pub(crate) mod binder;
pub(crate) mod connection;
pub(crate) mod join;
pub(crate) mod sqlite;
pub(crate) mod view;
