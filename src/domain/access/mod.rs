pub mod guard;

pub use guard::{
    can_agent_decide, can_cancel_confirmed, can_cancel_request, can_confirm_request,
    can_owner_act, can_pay, can_reject_request, can_request_checkout, AllowedActions,
};
