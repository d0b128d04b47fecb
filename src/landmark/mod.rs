// src/landmark/mod.rs
//! Skeleton sample data model and the landmark source seam

pub mod source;
pub mod types;

pub use source::{ScriptedSource, SkeletonSource, SourceError};
pub use types::{
    Landmark, LandmarkIndex, SkeletonSample, LANDMARK_COUNT, TRANSPORT_LANDMARKS,
    VISIBILITY_LANDMARKS,
};
