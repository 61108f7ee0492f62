use super::common::{arg, opt, opt_atomic, single};
use super::{CallContext, FunctionLibrary, FunctionSignature};
use crate::engine::runtime::Error;
use crate::xdm::{AtomicType, Sequence};

/// Register one constructor per concrete atomic type in `ns`:
/// `ns:type($arg as any-atomic?) as type?`, which casts its argument.
pub(super) fn register(lib: &mut FunctionLibrary, ns: &str) -> Result<(), Error> {
    for &ty in AtomicType::CONCRETE {
        let constructor = FunctionSignature::builder()
            .namespace(ns)
            .name(ty.name())
            .argument(arg("arg", opt(AtomicType::AnyAtomic)))
            .returns(opt(ty))
            .handler(move |_ctx: &CallContext<'_>, args: &[Sequence]| match opt_atomic(&args[0]) {
                Some(value) => ty.cast(value).map(single),
                None => Ok(Sequence::empty()),
            })
            .build()?;
        lib.register(constructor)?;
    }
    Ok(())
}
