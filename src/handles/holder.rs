//! Generation-counter arena owning vendor resources.
//!
//! The Oracle client hands out handles and descriptors whose disposal order matters: a statement
//! handle must not outlive its connection, a define buffer must not outlive its statement, a
//! locator fetched from a result set is owned by the define buffer it came from. The arena
//! records these dependencies as parent/child links between slots addressed by stable ids, so
//! releasing a parent deterministically disposes everything acquired under it, children before
//! parents, latest acquisition first.
//!
//! Ids carry a generation counter. A stale id (its slot released and possibly reused) is
//! detected instead of dereferenced, which is what makes it safe to hand ids to long lived
//! wrapper objects without tying their lifetimes into a knot.

use std::ffi::c_void;

use crate::error::Error;

/// How the resource behind a holder came into existence, deciding who disposes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocState {
    /// Allocated by the driver on behalf of the application. The vendor free function runs when
    /// the holder is released.
    Allocated,
    /// Allocated as one element of a descriptor array. The array container frees all elements in
    /// one call; releasing an element individually is a usage error.
    AllocatedArrayElem,
    /// Fetched from a result set or a parent composite and not modified since. The vendor owns
    /// the memory; release only drops the slot.
    FetchedClean,
    /// Fetched and since modified. Still vendor owned; the distinction matters to parents which
    /// must flush dirty children before disposing them.
    FetchedDirty,
}

/// Stable address of a holder within an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HolderId {
    index: u32,
    generation: u32,
}

type FreeFn = Box<dyn FnMut(*mut c_void)>;

struct Slot {
    generation: u32,
    occupied: Option<Holder>,
}

struct Holder {
    raw: *mut c_void,
    state: AllocState,
    parent: Option<HolderId>,
    /// Children in acquisition order. Disposal walks this back to front.
    children: Vec<HolderId>,
    /// Number of live shares of this holder. Disposal happens when the last share is released.
    refs: u32,
    free_fn: Option<FreeFn>,
}

/// Arena of vendor resources with parent/child disposal links.
#[derive(Default)]
pub struct HolderArena {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
}

impl HolderArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live holders.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.occupied.is_some()).count()
    }

    /// Attach ownership of `raw`. If `parent` is given, the new holder is pushed onto its
    /// children list and will be disposed with it. `free_fn` runs at disposal for `Allocated`
    /// resources; pass `None` for fetched resources the vendor owns.
    pub fn acquire(
        &mut self,
        raw: *mut c_void,
        state: AllocState,
        parent: Option<HolderId>,
        free_fn: Option<FreeFn>,
    ) -> Result<HolderId, Error> {
        if let Some(parent_id) = parent {
            // Validate the parent before the slot is created, so a stale parent cannot leave a
            // half linked holder behind.
            self.holder(parent_id)?;
        }
        let holder = Holder {
            raw,
            state,
            parent,
            children: Vec::new(),
            refs: 1,
            free_fn,
        };
        let id = match self.free_list.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.occupied = Some(holder);
                HolderId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = u32::try_from(self.slots.len())
                    .map_err(|_| Error::Internal("holder arena exhausted".to_string()))?;
                self.slots.push(Slot {
                    generation: 0,
                    occupied: Some(holder),
                });
                HolderId {
                    index,
                    generation: 0,
                }
            }
        };
        if let Some(parent_id) = parent {
            self.holder_mut(parent_id)?.children.push(id);
        }
        Ok(id)
    }

    /// Share the holder. The underlying resource is disposed once `release` has been called for
    /// every share.
    pub fn share(&mut self, id: HolderId) -> Result<HolderId, Error> {
        let holder = self.holder_mut(id)?;
        holder.refs += 1;
        Ok(id)
    }

    /// `true` if the next `release` will actually dispose the resource.
    pub fn is_last_holder(&self, id: HolderId) -> Result<bool, Error> {
        Ok(self.holder(id)?.refs == 1)
    }

    /// Raw resource pointer behind the id.
    pub fn raw(&self, id: HolderId) -> Result<*mut c_void, Error> {
        Ok(self.holder(id)?.raw)
    }

    pub fn state(&self, id: HolderId) -> Result<AllocState, Error> {
        Ok(self.holder(id)?.state)
    }

    /// Transitions a fetched holder to dirty. Invoked by wrappers on their first mutating
    /// operation. Holders in allocated states are unaffected.
    pub fn mark_dirty(&mut self, id: HolderId) -> Result<(), Error> {
        let holder = self.holder_mut(id)?;
        if holder.state == AllocState::FetchedClean {
            holder.state = AllocState::FetchedDirty;
        }
        Ok(())
    }

    /// `true` if `id` refers to a live holder.
    pub fn contains(&self, id: HolderId) -> bool {
        self.holder(id).is_ok()
    }

    /// Release one share of the holder. On the last share the holder and all its descendants are
    /// disposed: children in reverse acquisition order first, then the resource itself (via its
    /// free function, for driver allocated states), and the holder is detached from its parent.
    ///
    /// Fetched holders cannot be released directly by the application; their parent disposes
    /// them. Array element holders are disposed by their container.
    pub fn release(&mut self, id: HolderId) -> Result<(), Error> {
        match self.state(id)? {
            AllocState::FetchedClean | AllocState::FetchedDirty => {
                return Err(Error::InvalidValue {
                    argument: "fetched handle (owned by its parent)",
                })
            }
            AllocState::AllocatedArrayElem => {
                return Err(Error::InvalidValue {
                    argument: "array element handle (owned by its container)",
                })
            }
            AllocState::Allocated => (),
        }
        self.release_any(id)
    }

    /// Like [`Self::release`], but without the ownership checks. This is the path parents and
    /// array containers use on their children.
    pub fn release_any(&mut self, id: HolderId) -> Result<(), Error> {
        {
            let holder = self.holder_mut(id)?;
            if holder.refs > 1 {
                holder.refs -= 1;
                return Ok(());
            }
        }
        // Detach from the parent first. If a child disposal panics we would rather leak than
        // leave the parent pointing at a dead slot.
        if let Some(parent_id) = self.holder(id)?.parent {
            if let Ok(parent) = self.holder_mut(parent_id) {
                if let Some(position) = parent.children.iter().position(|&c| c == id) {
                    parent.children.remove(position);
                }
            }
        }
        self.dispose(id);
        Ok(())
    }

    /// Releases every live root holder (holders without parents). Used by connection teardown to
    /// dispose resources the application leaked.
    pub fn release_all(&mut self) {
        let roots: Vec<HolderId> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.occupied.as_ref().and_then(|h| {
                    h.parent.is_none().then_some(HolderId {
                        index: index as u32,
                        generation: slot.generation,
                    })
                })
            })
            .collect();
        // Latest acquisition first.
        for id in roots.into_iter().rev() {
            // Roots acquired earlier may already have been disposed as descendants of later
            // ones; a stale id is fine here.
            if self.contains(id) {
                self.dispose(id);
            }
        }
    }

    fn dispose(&mut self, id: HolderId) {
        let children = match self.holder(id) {
            Ok(holder) => holder.children.clone(),
            Err(_) => return,
        };
        for child in children.into_iter().rev() {
            self.dispose(child);
        }
        let slot = &mut self.slots[id.index as usize];
        if let Some(mut holder) = slot.occupied.take() {
            if matches!(
                holder.state,
                AllocState::Allocated | AllocState::AllocatedArrayElem
            ) {
                if let Some(free_fn) = holder.free_fn.as_mut() {
                    free_fn(holder.raw);
                }
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(id.index);
        }
    }

    fn holder(&self, id: HolderId) -> Result<&Holder, Error> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.occupied.as_ref())
            .ok_or(Error::NullPointer {
                argument: "released handle",
            })
    }

    fn holder_mut(&mut self, id: HolderId) -> Result<&mut Holder, Error> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.occupied.as_mut())
            .ok_or(Error::NullPointer {
                argument: "released handle",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{AllocState, HolderArena, HolderId};
    use std::{
        cell::RefCell,
        ffi::c_void,
        rc::Rc,
    };

    fn tracking_free(order: &Rc<RefCell<Vec<usize>>>) -> Box<dyn FnMut(*mut c_void)> {
        let order = Rc::clone(order);
        Box::new(move |raw| order.borrow_mut().push(raw as usize))
    }

    fn fake_ptr(value: usize) -> *mut c_void {
        value as *mut c_void
    }

    #[test]
    fn releasing_parent_disposes_children_lifo() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut arena = HolderArena::new();
        let parent = arena
            .acquire(fake_ptr(1), AllocState::Allocated, None, Some(tracking_free(&order)))
            .unwrap();
        let _first = arena
            .acquire(
                fake_ptr(2),
                AllocState::Allocated,
                Some(parent),
                Some(tracking_free(&order)),
            )
            .unwrap();
        let _second = arena
            .acquire(
                fake_ptr(3),
                AllocState::Allocated,
                Some(parent),
                Some(tracking_free(&order)),
            )
            .unwrap();

        arena.release(parent).unwrap();

        assert_eq!(vec![3, 2, 1], *order.borrow());
        assert_eq!(0, arena.live_count());
    }

    #[test]
    fn released_ids_go_stale() {
        let mut arena = HolderArena::new();
        let id = arena
            .acquire(fake_ptr(1), AllocState::Allocated, None, None)
            .unwrap();
        arena.release(id).unwrap();

        assert!(!arena.contains(id));
        assert!(arena.raw(id).is_err());

        // Reusing the slot must not resurrect the stale id.
        let successor = arena
            .acquire(fake_ptr(2), AllocState::Allocated, None, None)
            .unwrap();
        assert!(!arena.contains(id));
        assert!(arena.contains(successor));
    }

    #[test]
    fn release_detaches_from_parent_children_list() {
        let mut arena = HolderArena::new();
        let parent = arena
            .acquire(fake_ptr(1), AllocState::Allocated, None, None)
            .unwrap();
        let child = arena
            .acquire(fake_ptr(2), AllocState::Allocated, Some(parent), None)
            .unwrap();
        arena.release(child).unwrap();

        // Releasing the parent afterwards must not trip over the already dead child.
        arena.release(parent).unwrap();
        assert_eq!(0, arena.live_count());
    }

    #[test]
    fn fetched_holders_are_not_released_by_the_caller() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut arena = HolderArena::new();
        let parent = arena
            .acquire(fake_ptr(1), AllocState::Allocated, None, Some(tracking_free(&order)))
            .unwrap();
        let fetched = arena
            .acquire(fake_ptr(2), AllocState::FetchedClean, Some(parent), None)
            .unwrap();

        assert!(arena.release(fetched).is_err());
        assert!(arena.contains(fetched));

        // The parent disposes it, without running a vendor free for the fetched resource.
        arena.release(parent).unwrap();
        assert!(!arena.contains(fetched));
        assert_eq!(vec![1], *order.borrow());
    }

    #[test]
    fn array_elements_are_disposed_by_their_container_only() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut arena = HolderArena::new();
        let container = arena
            .acquire(fake_ptr(1), AllocState::Allocated, None, Some(tracking_free(&order)))
            .unwrap();
        let element = arena
            .acquire(
                fake_ptr(2),
                AllocState::AllocatedArrayElem,
                Some(container),
                Some(tracking_free(&order)),
            )
            .unwrap();

        assert!(arena.release(element).is_err());
        arena.release(container).unwrap();
        assert_eq!(vec![2, 1], *order.borrow());
    }

    #[test]
    fn mutating_a_fetched_holder_marks_it_dirty() {
        let mut arena = HolderArena::new();
        let id = arena
            .acquire(fake_ptr(1), AllocState::FetchedClean, None, None)
            .unwrap();
        arena.mark_dirty(id).unwrap();
        assert_eq!(AllocState::FetchedDirty, arena.state(id).unwrap());

        // Allocated holders do not change state.
        let allocated = arena
            .acquire(fake_ptr(2), AllocState::Allocated, None, None)
            .unwrap();
        arena.mark_dirty(allocated).unwrap();
        assert_eq!(AllocState::Allocated, arena.state(allocated).unwrap());
    }

    #[test]
    fn shared_holders_dispose_on_last_release() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut arena = HolderArena::new();
        let id = arena
            .acquire(fake_ptr(1), AllocState::Allocated, None, Some(tracking_free(&order)))
            .unwrap();
        let alias = arena.share(id).unwrap();
        assert_eq!(id, alias);
        assert!(!arena.is_last_holder(id).unwrap());

        arena.release(id).unwrap();
        assert!(order.borrow().is_empty());
        assert!(arena.is_last_holder(alias).unwrap());

        arena.release(alias).unwrap();
        assert_eq!(vec![1], *order.borrow());
    }

    #[test]
    fn release_all_disposes_leaked_roots() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut arena = HolderArena::new();
        let a = arena
            .acquire(fake_ptr(1), AllocState::Allocated, None, Some(tracking_free(&order)))
            .unwrap();
        let _a_child = arena
            .acquire(
                fake_ptr(2),
                AllocState::Allocated,
                Some(a),
                Some(tracking_free(&order)),
            )
            .unwrap();
        let _b = arena
            .acquire(fake_ptr(3), AllocState::Allocated, None, Some(tracking_free(&order)))
            .unwrap();

        arena.release_all();
        assert_eq!(vec![3, 2, 1], *order.borrow());
        assert_eq!(0, arena.live_count());
    }

    #[test]
    fn acquire_with_stale_parent_fails_cleanly() {
        let mut arena = HolderArena::new();
        let parent = arena
            .acquire(fake_ptr(1), AllocState::Allocated, None, None)
            .unwrap();
        arena.release(parent).unwrap();

        let result = arena.acquire(fake_ptr(2), AllocState::Allocated, Some(parent), None);
        assert!(result.is_err());
        assert_eq!(0, arena.live_count());
    }

    #[test]
    fn ids_are_value_types() {
        let id = HolderId {
            index: 3,
            generation: 7,
        };
        let copy = id;
        assert_eq!(id, copy);
    }
}
