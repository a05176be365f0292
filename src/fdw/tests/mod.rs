//! Unit tests for the foreign data wrapper module.
//!
//! Service behaviour is exercised against the in-memory catalog, whose
//! journal exposes transaction boundaries, and against a mocked catalog
//! where call counts matter.
