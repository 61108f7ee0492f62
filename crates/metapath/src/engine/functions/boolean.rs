use super::CallContext;
use super::common::single;
use crate::engine::runtime::Error;
use crate::xdm::Sequence;

pub(super) fn boolean_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(args[0].effective_boolean_value()?))
}

pub(super) fn not_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(!args[0].effective_boolean_value()?))
}

pub(super) fn true_fn(_ctx: &CallContext<'_>, _args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(true))
}

pub(super) fn false_fn(_ctx: &CallContext<'_>, _args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(false))
}
