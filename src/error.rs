use core::fmt::Debug;
use core::fmt::Display;

pub enum Error {
    ZeroCapacity,
    #[cfg(feature = "capture")]
    PCap(pcap::Error),
    #[cfg(feature = "capture")]
    UnsupportedLinkType(i32),
}

impl core::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::ZeroCapacity => write!(f, "Session table capacity must be non-zero"),
            #[cfg(feature = "capture")]
            Error::PCap(e) => write!(f, "PCap error: {e:?}"),
            #[cfg(feature = "capture")]
            Error::UnsupportedLinkType(linktype) => {
                write!(f, "Unsupported link type {linktype}, expected Ethernet")
            }
        }
    }
}

#[cfg(feature = "capture")]
impl From<pcap::Error> for Error {
    fn from(e: pcap::Error) -> Self {
        Error::PCap(e)
    }
}
