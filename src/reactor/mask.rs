// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::fmt;

use mio::Interest;

bitflags::bitflags! {
    #[derive(Default, Clone, Copy, PartialEq, Eq)]
    /// Readiness bits a registered file descriptor can be waited on for.
    pub struct FileEventMask: u8 {
        const READABLE  = 0b001;
        const WRITABLE  = 0b010;
        const EXCEPTION = 0b100;
    }
}

impl fmt::Debug for FileEventMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileEventMask(")?;
        let mut sep = "";
        if self.contains(Self::READABLE) {
            write!(f, "READABLE")?;
            sep = "|";
        }
        if self.contains(Self::WRITABLE) {
            write!(f, "{sep}WRITABLE")?;
            sep = "|";
        }
        if self.contains(Self::EXCEPTION) {
            write!(f, "{sep}EXCEPTION")?;
        }
        write!(f, ")")
    }
}

impl FileEventMask {
    /// Converts to the nearest `mio::Interest`. `EXCEPTION` alone has no mio
    /// equivalent and is folded into `READABLE`, matching mio's own
    /// delivery of OOB/hangup conditions on the read side.
    pub fn to_mio_interest(self) -> Option<Interest> {
        let mut interest: Option<Interest> = None;
        if self.intersects(Self::READABLE | Self::EXCEPTION) {
            interest = Some(Interest::READABLE);
        }
        if self.contains(Self::WRITABLE) {
            interest = Some(match interest {
                Some(i) => i.add(Interest::WRITABLE),
                None => Interest::WRITABLE,
            });
        }
        interest
    }
}
