//! The member-definition rewrite pass.
//!
//! Scans every field and method of a class for the marker pattern in its
//! name. The scan is name-based and kind-agnostic: only methods carry the
//! marker by convention, but nothing is skipped based on member kind. Members
//! are never added, removed, or reordered; a match only repoints the name
//! and widens the access flags.

use crate::{
    classfile::{member::MemberFlags, ClassFile},
    rewrite::strip_marker,
    Result,
};

/// Rewrite every marked member definition in place, returning the number of
/// members transformed.
///
/// For each member whose name carries the marker: the member is pointed at a
/// found-or-appended `Utf8` entry holding the real name, and the `BRIDGE` and
/// `SYNTHETIC` flag bits are OR-ed in (idempotent; a second pass finds no
/// marker and changes nothing).
///
/// # Errors
/// Returns [`crate::Error::PoolFull`] if a needed name entry cannot be
/// appended, or a reference error for a corrupt name index (cannot happen
/// after decode validation).
pub(crate) fn rewrite_members(class: &mut ClassFile) -> Result<usize> {
    let ClassFile {
        constant_pool,
        fields,
        methods,
        ..
    } = class;

    let mut count = 0;
    for member in fields.iter_mut().chain(methods.iter_mut()) {
        let name = constant_pool.utf8(member.name_index)?;
        let Some(real_name) = strip_marker(name) else {
            continue;
        };

        let real_name = real_name.to_vec();
        member.name_index = constant_pool.find_or_add_utf8(&real_name)?;
        member.access_flags |= MemberFlags::BRIDGE | MemberFlags::SYNTHETIC;
        count += 1;
    }

    Ok(count)
}
