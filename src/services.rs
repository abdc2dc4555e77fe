//! Type-keyed registry of lazily built, shared services.
//!
//! The locator is an ordinary value: build one at startup, register
//! factories, and pass it to whatever needs to resolve capabilities. A
//! service is constructed on first request and cached for the life of the
//! locator. Re-entrant resolution of a type that is still being built is
//! reported as a circular dependency instead of recursing.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::ServiceError;

type Factory = Rc<dyn Fn(&ServiceLocator) -> Rc<dyn Any>>;

#[derive(Default)]
pub struct ServiceLocator {
    factories: RefCell<HashMap<TypeId, Factory>>,
    services: RefCell<HashMap<TypeId, Rc<dyn Any>>>,
    resolving: RefCell<HashSet<TypeId>>,
}

impl ServiceLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or overwrite the constructor for `T`. An instance that was
    /// already built stays cached until [`remove_factory`](Self::remove_factory).
    pub fn add_factory<T: 'static>(&self, build: impl Fn(&ServiceLocator) -> T + 'static) {
        let factory: Factory =
            Rc::new(move |locator: &ServiceLocator| Rc::new(build(locator)) as Rc<dyn Any>);
        self.factories
            .borrow_mut()
            .insert(TypeId::of::<T>(), factory);
    }

    /// Register an already-built instance.
    pub fn add_instance<T: 'static>(&self, instance: Rc<T>) {
        self.services
            .borrow_mut()
            .insert(TypeId::of::<T>(), instance as Rc<dyn Any>);
    }

    /// Drop both the factory and any cached instance for `T`.
    pub fn remove_factory<T: 'static>(&self) {
        let type_id = TypeId::of::<T>();
        self.factories.borrow_mut().remove(&type_id);
        self.services.borrow_mut().remove(&type_id);
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.services.borrow().contains_key(&type_id)
            || self.factories.borrow().contains_key(&type_id)
    }

    pub fn try_get_service<T: 'static>(&self) -> Result<Rc<T>, ServiceError> {
        let type_id = TypeId::of::<T>();
        let name = type_name::<T>();

        if self.resolving.borrow().contains(&type_id) {
            return Err(ServiceError::CircularDependency(name));
        }

        let cached = self.services.borrow().get(&type_id).cloned();
        if let Some(service) = cached {
            return service
                .downcast::<T>()
                .map_err(|_| ServiceError::TypeMismatch(name));
        }

        let factory = self
            .factories
            .borrow()
            .get(&type_id)
            .cloned()
            .ok_or(ServiceError::NotRegistered(name))?;

        // No RefCell borrow may be held here: the factory resolves its own
        // dependencies through `self`.
        self.resolving.borrow_mut().insert(type_id);
        let instance = factory(self);
        self.resolving.borrow_mut().remove(&type_id);

        self.services
            .borrow_mut()
            .insert(type_id, Rc::clone(&instance));
        instance
            .downcast::<T>()
            .map_err(|_| ServiceError::TypeMismatch(name))
    }

    /// Like [`try_get_service`](Self::try_get_service), but logs the failure
    /// and hands back `None` for the caller to tolerate.
    pub fn get_service<T: 'static>(&self) -> Option<Rc<T>> {
        match self.try_get_service::<T>() {
            Ok(service) => Some(service),
            Err(err @ ServiceError::NotRegistered(_)) => {
                log::warn!("#ServiceLocator# {}", err);
                None
            }
            Err(err) => {
                log::error!("#ServiceLocator# {}", err);
                None
            }
        }
    }
}
