// ABOUTME: Flat set of every live terminal session, independent of tab placement.
// ABOUTME: Owns the sessions; the split trees only refer to them by SessionId.

use crate::SessionId;

#[derive(Debug)]
pub struct SessionRegistry<S> {
    /// Creation order
    sessions: Vec<(SessionId, S)>,
    next_id: u64,
}

impl<S> SessionRegistry<S> {
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
            next_id: 1,
        }
    }

    /// Reserve an id for a session about to be created. Ids are never reused.
    pub fn allocate_id(&mut self) -> SessionId {
        let id = SessionId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, id: SessionId, session: S) {
        assert!(!self.contains(id), "session {:?} registered twice", id);
        self.sessions.push((id, session));
    }

    pub fn remove(&mut self, id: SessionId) -> Option<S> {
        let index = self.sessions.iter().position(|(sid, _)| *sid == id)?;
        Some(self.sessions.remove(index).1)
    }

    pub fn get(&self, id: SessionId) -> Option<&S> {
        self.sessions
            .iter()
            .find(|(sid, _)| *sid == id)
            .map(|(_, session)| session)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut S> {
        self.sessions
            .iter_mut()
            .find(|(sid, _)| *sid == id)
            .map(|(_, session)| session)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.iter().any(|(sid, _)| *sid == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SessionId, &S)> {
        self.sessions.iter().map(|(id, session)| (*id, session))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SessionId, &mut S)> {
        self.sessions.iter_mut().map(|(id, session)| (*id, session))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Remove every session, in creation order
    pub fn drain(&mut self) -> Vec<(SessionId, S)> {
        std::mem::take(&mut self.sessions)
    }
}

impl<S> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}
