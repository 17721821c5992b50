//! Detail decoder: the architecture-neutral block and architecture dispatch.

use log::trace;

use capdec_core::{ArchDetail, Architecture, Detail, GroupId, RegId};

use crate::decoder::slice_counted;
use crate::error::DecodeError;
use crate::raw::RawDetail;

/// Decodes a detail block for a record at `address`.
///
/// `arch` must be the architecture the handle was opened with; it selects
/// which member of the payload union is read.
pub fn decode_detail(raw: &RawDetail, arch: Architecture, address: u64) -> Result<Detail, DecodeError> {
    let regs_read = slice_counted(&raw.regs_read, usize::from(raw.regs_read_count), address, "regs_read")?;
    let regs_write = slice_counted(&raw.regs_write, usize::from(raw.regs_write_count), address, "regs_write")?;
    let groups = slice_counted(&raw.groups, usize::from(raw.groups_count), address, "groups")?;

    Ok(Detail {
        regs_read: regs_read.iter().copied().map(RegId::from).collect(),
        regs_write: regs_write.iter().copied().map(RegId::from).collect(),
        groups: groups.iter().copied().map(GroupId).collect(),
        arch: decode_arch(raw, arch, address)?,
    })
}

fn decode_arch(raw: &RawDetail, arch: Architecture, address: u64) -> Result<Option<ArchDetail>, DecodeError> {
    match arch {
        #[cfg(feature = "x86")]
        Architecture::X86 => {
            // SAFETY: the engine fills the x86 member for x86 handles, and
            // every field of it is plain integer data.
            let x86 = unsafe { &raw.arch.x86 };
            crate::x86::decode_x86(x86, address).map(|x86| Some(ArchDetail::X86(x86)))
        }
        _ => {
            trace!("no detail decoder for {}; payload skipped at {:#x}", arch, address);
            Ok(None)
        }
    }
}
