//! Identity registry: connected participants and their balances.

use rand::Rng;
use std::collections::HashMap;
use tombola_types::{EngineError, Participant, Result, Role, ID_BYTES};

/// Generates a fresh random participant id: `ID_BYTES` bytes of
/// randomness rendered as lowercase hex. The id doubles as the bearer
/// token, so it must be unguessable.
fn generate_id<R: Rng>(rng: &mut R) -> String {
    let mut bytes = [0u8; ID_BYTES];
    rng.fill(&mut bytes[..]);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Default)]
pub struct Registry {
    participants: HashMap<String, Participant>,
}

impl Registry {
    /// Registers a new participant with a fresh id and zero balance.
    /// The name is trimmed; an empty result is rejected.
    pub fn register(&mut self, name: &str, role: Role) -> Result<&Participant> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput("name must not be empty".into()));
        }

        // 64 bits of randomness makes a collision effectively
        // impossible; loop rather than overwrite on the pathological
        // case.
        let mut rng = rand::thread_rng();
        let id = loop {
            let id = generate_id(&mut rng);
            if !self.participants.contains_key(&id) {
                break id;
            }
        };

        let participant = Participant::new(id.clone(), name.to_string(), role);
        Ok(self.participants.entry(id).or_insert(participant))
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Participant> {
        self.participants.get_mut(id)
    }

    /// The unique cashier, if one is registered.
    pub fn cashier(&self) -> Option<&Participant> {
        self.participants
            .values()
            .find(|p| p.role == Role::Cashier)
    }

    pub fn cashier_id(&self) -> Option<String> {
        self.cashier().map(|p| p.id.clone())
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput("name must not be empty".into()));
        }
        let participant = self
            .participants
            .get_mut(id)
            .ok_or_else(|| EngineError::NotFound(format!("unknown participant {id}")))?;
        participant.name = name.to_string();
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Participant> {
        self.participants.remove(id)
    }

    /// Writes a balance the engine has already computed and validated.
    /// Unknown ids are ignored; the engine checks existence before
    /// committing.
    pub fn set_balance(&mut self, id: &str, balance: i64) {
        if let Some(p) = self.participants.get_mut(id) {
            p.balance = balance;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
