//! Object repository: instances registered locally or discovered from others.

use crate::error::{KernelError, KernelResult};
use lrc_types::{AttributeValueMap, FederateHandle, ObjectClassHandle, ObjectInstanceHandle};
use std::collections::HashMap;

/// Local view of one object instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectInstance {
    pub handle: ObjectInstanceHandle,
    pub class: ObjectClassHandle,
    pub name: String,
    /// Last known value of each reflected or updated attribute.
    pub attributes: AttributeValueMap,
}

impl ObjectInstance {
    pub fn registrar(&self) -> FederateHandle {
        self.handle.registrar()
    }
}

#[derive(Debug)]
pub struct ObjectRepository {
    instances: HashMap<ObjectInstanceHandle, ObjectInstance>,
    names: HashMap<String, ObjectInstanceHandle>,
    next_serial: u32,
}

impl Default for ObjectRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            instances: HashMap::new(),
            names: HashMap::new(),
            next_serial: 1,
        }
    }

    /// Register a new instance owned by `federate`. Without a name one is
    /// derived from the handle.
    pub fn register(
        &mut self,
        federate: FederateHandle,
        class: ObjectClassHandle,
        name: Option<String>,
    ) -> KernelResult<&ObjectInstance> {
        if let Some(name) = &name {
            if self.names.contains_key(name) {
                return Err(KernelError::ObjectInstanceNameInUse { name: name.clone() });
            }
        }

        let handle = ObjectInstanceHandle::compose(federate, self.next_serial);
        self.next_serial += 1;
        let name = name.unwrap_or_else(|| format!("HLAobject_{handle}"));
        self.insert(ObjectInstance {
            handle,
            class,
            name,
            attributes: AttributeValueMap::new(),
        })
    }

    /// Record an instance registered by another federate.
    pub fn discover(
        &mut self,
        handle: ObjectInstanceHandle,
        class: ObjectClassHandle,
        name: String,
    ) -> KernelResult<&ObjectInstance> {
        if self.instances.contains_key(&handle) {
            return Err(KernelError::ObjectInstanceAlreadyExists { instance: handle });
        }
        self.insert(ObjectInstance {
            handle,
            class,
            name,
            attributes: AttributeValueMap::new(),
        })
    }

    fn insert(&mut self, instance: ObjectInstance) -> KernelResult<&ObjectInstance> {
        let handle = instance.handle;
        self.names.insert(instance.name.clone(), handle);
        Ok(self.instances.entry(handle).or_insert(instance))
    }

    /// Merge new attribute values into a known instance.
    pub fn reflect(
        &mut self,
        handle: ObjectInstanceHandle,
        values: &AttributeValueMap,
    ) -> KernelResult<&ObjectInstance> {
        let instance = self
            .instances
            .get_mut(&handle)
            .ok_or(KernelError::ObjectInstanceNotKnown { instance: handle })?;
        instance.attributes.merge(values);
        Ok(instance)
    }

    /// Delete an instance on behalf of `federate`, which must have registered it.
    pub fn delete_owned(
        &mut self,
        federate: FederateHandle,
        handle: ObjectInstanceHandle,
    ) -> KernelResult<ObjectInstance> {
        let registrar = self
            .instances
            .get(&handle)
            .map(ObjectInstance::registrar)
            .ok_or(KernelError::ObjectInstanceNotKnown { instance: handle })?;
        if registrar != federate {
            return Err(KernelError::DeletePrivilegeNotHeld { instance: handle });
        }
        self.remove(handle)
            .ok_or(KernelError::ObjectInstanceNotKnown { instance: handle })
    }

    /// Forget an instance deleted elsewhere.
    pub fn remove(&mut self, handle: ObjectInstanceHandle) -> Option<ObjectInstance> {
        let instance = self.instances.remove(&handle)?;
        self.names.remove(&instance.name);
        Some(instance)
    }

    pub fn get(&self, handle: ObjectInstanceHandle) -> Option<&ObjectInstance> {
        self.instances.get(&handle)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.names.clear();
    }
}
