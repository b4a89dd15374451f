use std::collections::HashMap;

use log::debug;

use crate::model::item::ActionItem;
use crate::model::map::ActionMap;
use crate::model::task::{Suit, Task, TaskStatus};

use super::{ItemPatch, MapPatch, Store, StoreError};

/// In-memory reference implementation of [`Store`].
///
/// This is the authoritative-semantics reference and the test double: versions
/// start at 1 and increment by exactly 1 on every accepted write, non-forced
/// writes are rejected on version mismatch, map deletion cascades to items,
/// and the item↔task link is kept consistent on both sides. Production
/// deployments put a real backend behind the same trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    maps: HashMap<String, ActionMap>,
    items: HashMap<String, ActionItem>,
    tasks: HashMap<String, Task>,
    next_id: u64,
    fail_next: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Make the next write fail with a transient error, simulating a network
    /// fault between client and store
    pub fn fail_next_write(&mut self) {
        self.fail_next = true;
    }

    fn fresh_id(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("{kind}-{}", self.next_id)
    }

    fn take_injected_failure(&mut self) -> Result<(), StoreError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(StoreError::Transient("injected write failure".into()));
        }
        Ok(())
    }

    // --- Lifecycle commands -------------------------------------------------

    /// Create a new map at version 1
    pub fn create_map(&mut self, title: &str) -> Result<ActionMap, StoreError> {
        validate_title(title)?;
        let id = self.fresh_id("map");
        let map = ActionMap::new(id.clone(), title.trim());
        self.maps.insert(id, map.clone());
        Ok(map)
    }

    /// Create a new item at version 1, appended after its last sibling
    pub fn create_item(
        &mut self,
        map_id: &str,
        parent_item_id: Option<&str>,
        title: &str,
    ) -> Result<ActionItem, StoreError> {
        validate_title(title)?;
        if !self.maps.contains_key(map_id) {
            return Err(StoreError::NotFound(map_id.to_string()));
        }
        if let Some(pid) = parent_item_id {
            let parent = self
                .items
                .get(pid)
                .ok_or_else(|| StoreError::NotFound(pid.to_string()))?;
            if parent.map_id != map_id {
                return Err(StoreError::Validation(format!(
                    "parent {pid} belongs to a different map"
                )));
            }
        }

        let sort_order = self
            .items
            .values()
            .filter(|it| it.map_id == map_id && it.parent_item_id.as_deref() == parent_item_id)
            .map(|it| it.sort_order)
            .max()
            .map_or(0, |max| max + 1);

        let id = self.fresh_id("item");
        let mut item = ActionItem::new(id.clone(), map_id, title.trim());
        item.parent_item_id = parent_item_id.map(str::to_string);
        item.sort_order = sort_order;
        self.items.insert(id, item.clone());
        Ok(item)
    }

    /// Create a new ground-level task
    pub fn create_task(&mut self, title: &str, suit: Suit) -> Result<Task, StoreError> {
        validate_title(title)?;
        let id = self.fresh_id("task");
        let task = Task::new(id.clone(), title.trim(), suit);
        self.tasks.insert(id, task.clone());
        Ok(task)
    }

    /// Set a task's status. Task state is collaborator-owned; this stands in
    /// for the external to-do tool updating its side.
    pub fn set_task_status(&mut self, id: &str, status: TaskStatus) -> Result<(), StoreError> {
        let task = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        task.status = status;
        Ok(())
    }

    /// Link a task to an item, keeping both sides consistent. A task already
    /// linked elsewhere is moved. Bumps the version of every touched item.
    pub fn link_task(&mut self, item_id: &str, task_id: &str) -> Result<(), StoreError> {
        if !self.items.contains_key(item_id) {
            return Err(StoreError::NotFound(item_id.to_string()));
        }
        let previous = self
            .tasks
            .get(task_id)
            .ok_or_else(|| StoreError::NotFound(task_id.to_string()))?
            .action_item_id
            .clone();
        if previous.as_deref() == Some(item_id) {
            return Ok(());
        }
        if let Some(prev_id) = previous
            && let Some(prev_item) = self.items.get_mut(&prev_id)
        {
            prev_item.linked_task_ids.retain(|id| id != task_id);
            prev_item.version += 1;
        }

        if let Some(item) = self.items.get_mut(item_id) {
            if !item.linked_task_ids.iter().any(|id| id == task_id) {
                item.linked_task_ids.push(task_id.to_string());
            }
            item.version += 1;
        }
        if let Some(task) = self.tasks.get_mut(task_id) {
            task.action_item_id = Some(item_id.to_string());
        }
        Ok(())
    }

    /// Unlink a task from whatever item holds it
    pub fn unlink_task(&mut self, task_id: &str) -> Result<(), StoreError> {
        let task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| StoreError::NotFound(task_id.to_string()))?;
        let Some(item_id) = task.action_item_id.take() else {
            return Ok(());
        };
        if let Some(item) = self.items.get_mut(&item_id) {
            item.linked_task_ids.retain(|id| id != task_id);
            item.version += 1;
        }
        Ok(())
    }

    /// Delete an item and its whole subtree, clearing task back-references
    pub fn delete_item(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.items.contains_key(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let mut doomed = vec![id.to_string()];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let parent = doomed[cursor].clone();
            for child in self
                .items
                .values()
                .filter(|it| it.parent_item_id.as_deref() == Some(parent.as_str()))
            {
                doomed.push(child.id.clone());
            }
            cursor += 1;
        }
        for item_id in doomed {
            if let Some(item) = self.items.remove(&item_id) {
                for task_id in &item.linked_task_ids {
                    if let Some(task) = self.tasks.get_mut(task_id) {
                        task.action_item_id = None;
                    }
                }
            }
        }
        Ok(())
    }

    /// Delete a map. Items are cascade-deleted first (and their tasks
    /// unlinked) — a map is never removed while items still reference it.
    pub fn delete_map(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.maps.contains_key(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let roots: Vec<String> = self
            .items
            .values()
            .filter(|it| it.map_id == id && it.parent_item_id.is_none())
            .map(|it| it.id.clone())
            .collect();
        for root in roots {
            self.delete_item(&root)?;
        }
        // Defensive sweep: orphaned descendants with dangling parents
        let leftovers: Vec<String> = self
            .items
            .values()
            .filter(|it| it.map_id == id)
            .map(|it| it.id.clone())
            .collect();
        for item_id in leftovers {
            self.delete_item(&item_id)?;
        }
        self.maps.remove(id);
        Ok(())
    }
}

impl Store for MemoryStore {
    fn fetch_maps(&self) -> Result<Vec<ActionMap>, StoreError> {
        let mut maps: Vec<ActionMap> = self.maps.values().cloned().collect();
        maps.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(maps)
    }

    fn fetch_map(&self, id: &str) -> Result<ActionMap, StoreError> {
        self.maps
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn write_map(
        &mut self,
        id: &str,
        patch: &MapPatch,
        expected_version: u64,
        force: bool,
    ) -> Result<ActionMap, StoreError> {
        self.take_injected_failure()?;
        let map = self
            .maps
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if !force && map.version != expected_version {
            return Err(StoreError::Conflict {
                current_version: map.version,
            });
        }
        apply_map_patch(map, patch)?;
        map.version += 1;
        debug!("map {id} written at version {}", map.version);
        Ok(map.clone())
    }

    fn fetch_items(&self, map_id: &str) -> Result<Vec<ActionItem>, StoreError> {
        if !self.maps.contains_key(map_id) {
            return Err(StoreError::NotFound(map_id.to_string()));
        }
        let mut items: Vec<ActionItem> = self
            .items
            .values()
            .filter(|it| it.map_id == map_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    fn fetch_item(&self, id: &str) -> Result<ActionItem, StoreError> {
        self.items
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn write_item(
        &mut self,
        id: &str,
        patch: &ItemPatch,
        expected_version: u64,
        force: bool,
    ) -> Result<ActionItem, StoreError> {
        self.take_injected_failure()?;
        // The version gate comes before any patch validation: a stale
        // submission always surfaces Conflict and enters the resolution
        // protocol, whichever fields it touches.
        let current = self
            .items
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if !force && current.version != expected_version {
            return Err(StoreError::Conflict {
                current_version: current.version,
            });
        }
        if let Some(Some(pid)) = &patch.parent_item_id {
            if pid == id {
                return Err(StoreError::Validation("item cannot be its own parent".into()));
            }
            match self.items.get(pid.as_str()) {
                None => return Err(StoreError::Validation(format!("parent {pid} not found"))),
                Some(parent) if parent.map_id != current.map_id => {
                    return Err(StoreError::Validation(format!(
                        "parent {pid} belongs to a different map"
                    )));
                }
                Some(_) => {}
            }
        }
        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        apply_item_patch(item, patch)?;
        item.version += 1;
        debug!("item {id} written at version {}", item.version);
        Ok(item.clone())
    }

    fn fetch_tasks(&self, map_id: &str) -> Result<Vec<Task>, StoreError> {
        if !self.maps.contains_key(map_id) {
            return Err(StoreError::NotFound(map_id.to_string()));
        }
        let linked: std::collections::HashSet<&str> = self
            .items
            .values()
            .filter(|it| it.map_id == map_id)
            .flat_map(|it| it.linked_task_ids.iter().map(String::as_str))
            .collect();
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|t| linked.contains(t.id.as_str()))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tasks)
    }
}

fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::Validation("title must not be empty".into()));
    }
    Ok(())
}

fn apply_map_patch(map: &mut ActionMap, patch: &MapPatch) -> Result<(), StoreError> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
        map.title = title.trim().to_string();
    }
    if let Some(description) = &patch.description {
        map.description = description.clone();
    }
    if let Some(key_result_id) = &patch.key_result_id {
        map.key_result_id = key_result_id.clone();
    }
    if let Some(period_start) = patch.period_start {
        map.period_start = period_start;
    }
    if let Some(period_end) = patch.period_end {
        map.period_end = period_end;
    }
    if let Some(archived) = patch.archived {
        map.archived = archived;
    }
    Ok(())
}

fn apply_item_patch(item: &mut ActionItem, patch: &ItemPatch) -> Result<(), StoreError> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
        item.title = title.trim().to_string();
    }
    if let Some(description) = &patch.description {
        item.description = description.clone();
    }
    if let Some(status) = patch.status {
        item.status = status;
    }
    if let Some(priority) = patch.priority {
        item.priority = priority;
    }
    if let Some(due_date) = patch.due_date {
        item.due_date = due_date;
    }
    if let Some(sort_order) = patch.sort_order {
        item.sort_order = sort_order;
    }
    if let Some(parent_item_id) = &patch.parent_item_id {
        item.parent_item_id = parent_item_id.clone();
    }
    Ok(())
}
