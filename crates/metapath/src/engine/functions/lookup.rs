use super::common::{integer_arg, string_arg};
use super::{CallContext, FunctionService};
use crate::engine::runtime::Error;
use crate::xdm::{Item, Sequence};

/// A function item for `name#arity` from the process-wide service, or the
/// empty sequence when no such function exists.
pub(super) fn function_lookup_fn(ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let name = ctx.dynamic.static_context().resolve_function_name(string_arg(&args[0]).trim())?;
    let Ok(arity) = usize::try_from(integer_arg(&args[1], "arity")?) else {
        return Ok(Sequence::empty());
    };
    let service = FunctionService::instance()?;
    Ok(service.library().get_function(&name, arity).map(|f| Sequence::singleton(Item::Function(f))).unwrap_or_default())
}
