// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::Value;
use std::sync::Arc;

use crate::{ResourceId, ResourceItem, ServiceError};

/// Persistence contract for one entity collection.
pub trait ResourceService {
    /// Raw collection response; envelope shape varies per backend endpoint.
    fn get_all(&self) -> Result<Value, ServiceError>;
    fn create(&self, data: &ResourceItem) -> Result<Value, ServiceError>;
    fn update(&self, id: &ResourceId, data: &ResourceItem) -> Result<Value, ServiceError>;
    fn delete(&self, id: &ResourceId) -> Result<(), ServiceError>;
}

impl<T: ResourceService + ?Sized> ResourceService for &T {
    fn get_all(&self) -> Result<Value, ServiceError> {
        (**self).get_all()
    }

    fn create(&self, data: &ResourceItem) -> Result<Value, ServiceError> {
        (**self).create(data)
    }

    fn update(&self, id: &ResourceId, data: &ResourceItem) -> Result<Value, ServiceError> {
        (**self).update(id, data)
    }

    fn delete(&self, id: &ResourceId) -> Result<(), ServiceError> {
        (**self).delete(id)
    }
}

impl<T: ResourceService + ?Sized> ResourceService for Box<T> {
    fn get_all(&self) -> Result<Value, ServiceError> {
        (**self).get_all()
    }

    fn create(&self, data: &ResourceItem) -> Result<Value, ServiceError> {
        (**self).create(data)
    }

    fn update(&self, id: &ResourceId, data: &ResourceItem) -> Result<Value, ServiceError> {
        (**self).update(id, data)
    }

    fn delete(&self, id: &ResourceId) -> Result<(), ServiceError> {
        (**self).delete(id)
    }
}

impl<T: ResourceService + ?Sized> ResourceService for Arc<T> {
    fn get_all(&self) -> Result<Value, ServiceError> {
        (**self).get_all()
    }

    fn create(&self, data: &ResourceItem) -> Result<Value, ServiceError> {
        (**self).create(data)
    }

    fn update(&self, id: &ResourceId, data: &ResourceItem) -> Result<Value, ServiceError> {
        (**self).update(id, data)
    }

    fn delete(&self, id: &ResourceId) -> Result<(), ServiceError> {
        (**self).delete(id)
    }
}
