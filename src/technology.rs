//! Supported renewable technologies and their provider-specific parameters.

use std::fmt;

/// A renewable technology with its own resource dataset and cost table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Technology {
    Wind,
    Solar,
}

impl Technology {
    /// Label used in the `tech` column of cost table files.
    pub fn label(&self) -> &'static str {
        match self {
            Technology::Wind => "Wind",
            Technology::Solar => "Solar",
        }
    }

    /// The column of the provider series that the summary statistic is
    /// computed over.
    pub fn target_field(&self) -> &'static str {
        match self {
            Technology::Wind => "Speed",
            Technology::Solar => "GHI",
        }
    }

    /// Path below the provider base URL for this technology's download
    /// endpoint.
    pub(crate) fn endpoint_path(&self) -> &'static str {
        match self {
            Technology::Wind => "wind-toolkit/v2/wind/wtk-srw-download",
            Technology::Solar => "nsrdb/v2/solar/psm3-download.csv",
        }
    }

    /// Directory name for this technology's cache artifacts.
    pub(crate) fn cache_segment(&self) -> &'static str {
        match self {
            Technology::Wind => "wind",
            Technology::Solar => "solar",
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
