//! COSEM structures carried inside xDLMS requests

pub mod selective_access;
