use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Managed buckets
///
/// One bucket per content category. Every bucket is provisioned lazily with a
/// public-read policy and is never deleted by this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketKind {
    Homepage,
    Gallery,
    Profile,
    Resource,
    Upload,
}

impl BucketKind {
    pub const ALL: [BucketKind; 5] = [
        BucketKind::Homepage,
        BucketKind::Gallery,
        BucketKind::Profile,
        BucketKind::Resource,
        BucketKind::Upload,
    ];

    pub fn bucket_name(&self) -> &'static str {
        match self {
            BucketKind::Homepage => "homepage",
            BucketKind::Gallery => "gallery",
            BucketKind::Profile => "profiles",
            BucketKind::Resource => "resources",
            BucketKind::Upload => "uploads",
        }
    }

    pub fn from_bucket_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.bucket_name() == name)
    }

    /// Whether keys in this bucket start with `{year}/{month}/`.
    pub fn is_date_organized(&self) -> bool {
        matches!(self, BucketKind::Gallery | BucketKind::Upload)
    }
}

impl FromStr for BucketKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "homepage" => Ok(BucketKind::Homepage),
            "gallery" => Ok(BucketKind::Gallery),
            "profile" | "profiles" => Ok(BucketKind::Profile),
            "resource" | "resources" => Ok(BucketKind::Resource),
            "upload" | "uploads" => Ok(BucketKind::Upload),
            _ => Err(anyhow::anyhow!("Invalid bucket kind: {}", s)),
        }
    }
}

impl Display for BucketKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.bucket_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_kind_round_trips_through_name() {
        for kind in BucketKind::ALL {
            assert_eq!(BucketKind::from_bucket_name(kind.bucket_name()), Some(kind));
            assert_eq!(kind.to_string().parse::<BucketKind>().unwrap(), kind);
        }
        assert_eq!(BucketKind::from_bucket_name("unknown"), None);
    }

    #[test]
    fn test_date_organized_buckets() {
        assert!(BucketKind::Gallery.is_date_organized());
        assert!(BucketKind::Upload.is_date_organized());
        assert!(!BucketKind::Homepage.is_date_organized());
        assert!(!BucketKind::Profile.is_date_organized());
        assert!(!BucketKind::Resource.is_date_organized());
    }

    #[test]
    fn test_bucket_kind_from_str() {
        assert_eq!("PROFILE".parse::<BucketKind>().unwrap(), BucketKind::Profile);
        assert!("invalid".parse::<BucketKind>().is_err());
    }
}
