//! Context - Traversal state shared by one projection
//!
//! Tracks the field path (for error messages), enforces the depth limit and
//! applies the mismatch policy from [`MapperConfig`].

use std::fmt;

use crate::error::{MapError, MapResult};
use crate::settings::{MapperConfig, MismatchPolicy};

pub struct Context<'a> {
    config: &'a MapperConfig,
    segments: Vec<String>,
}

impl<'a> Context<'a> {
    pub fn new(config: &'a MapperConfig) -> Self {
        Self {
            config,
            segments: Vec::new(),
        }
    }

    pub fn config(&self) -> &'a MapperConfig {
        self.config
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Dotted path of the current position, e.g. `rules[2].clients`
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            if !path.is_empty() && !segment.starts_with('[') {
                path.push('.');
            }
            path.push_str(segment);
        }
        path
    }

    /// Run `f` one level deeper, under `segment`
    pub fn scoped<T>(
        &mut self,
        segment: impl Into<String>,
        f: impl FnOnce(&mut Self) -> MapResult<T>,
    ) -> MapResult<T> {
        self.segments.push(segment.into());
        let result = if self.segments.len() > self.config.max_depth {
            Err(MapError::DepthExceeded {
                path: self.path(),
                limit: self.config.max_depth,
            })
        } else {
            f(self)
        };
        self.segments.pop();
        result
    }

    /// Run `f` for element `index` of a collection
    pub fn element<T>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Self) -> MapResult<T>,
    ) -> MapResult<T> {
        self.scoped(format!("[{}]", index), f)
    }

    pub fn mismatch(&self, expected: impl fmt::Display, found: impl fmt::Display) -> MapError {
        MapError::TypeMismatch {
            path: self.path(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn shape(&self, expected: impl fmt::Display, found: impl fmt::Display) -> MapError {
        MapError::Shape {
            path: self.path(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn overflow(&self, value: impl fmt::Display, target: &'static str) -> MapError {
        MapError::Overflow {
            path: self.path(),
            value: value.to_string(),
            target,
        }
    }

    /// Attach the current path to an error raised without one
    pub fn locate(&self, err: MapError) -> MapError {
        err.at(&self.path())
    }

    /// Apply the mismatch policy: a type mismatch is either returned or logged
    /// and replaced by `T::default()` (nothing written); every other error is
    /// returned
    pub fn tolerate<T: Default>(&self, result: MapResult<T>) -> MapResult<T> {
        match result {
            Err(err) if err.is_type_mismatch() => match self.config.on_type_mismatch {
                MismatchPolicy::Error => Err(err),
                MismatchPolicy::Skip => {
                    log::debug!("skipping assignment: {}", err);
                    Ok(T::default())
                }
            },
            other => other,
        }
    }
}
