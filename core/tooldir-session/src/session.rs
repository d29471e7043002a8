use crate::provider::IdentityRecord;
use tooldir_types::IdentityId;

/// An established principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: IdentityId,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// The current session. Exactly one state holds at any time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    /// No identity known yet.
    #[default]
    Unresolved,
    /// A provider-issued anonymous identity. Never carries a name or photo.
    Anonymous(Identity),
    /// A named identity.
    Authenticated(Identity),
}

impl Session {
    /// Maps a provider report onto a session state.
    pub fn from_record(record: Option<IdentityRecord>) -> Self {
        match record {
            None => Session::Unresolved,
            Some(record) if record.is_anonymous => Session::Anonymous(Identity {
                id: record.id,
                display_name: None,
                photo_url: None,
            }),
            Some(record) => Session::Authenticated(Identity {
                id: record.id,
                display_name: record.display_name,
                photo_url: record.photo_url,
            }),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Unresolved => None,
            Session::Anonymous(identity) | Session::Authenticated(identity) => Some(identity),
        }
    }

    pub fn identity_id(&self) -> Option<&IdentityId> {
        self.identity().map(|i| &i.id)
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Session::Unresolved)
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Session::Anonymous(_))
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    /// Short state name for logs.
    pub fn state_name(&self) -> &'static str {
        match self {
            Session::Unresolved => "unresolved",
            Session::Anonymous(_) => "anonymous",
            Session::Authenticated(_) => "authenticated",
        }
    }
}
