//! Share invitation payloads.

use crate::directory::email::EmailMessage;
use crate::model::schedule::ScheduleNo;

/// Builds the confirmation link an invitee follows to join a team.
pub fn share_confirm_link(base_url: &str, sc_no: ScheduleNo, invitee_id: &str) -> String {
    format!(
        "{}/teams/share/confirm/{}/{}",
        base_url.trim_end_matches('/'),
        sc_no,
        invitee_id
    )
}

/// Builds the invitation email sent by `host_id` to `invitee_id`.
pub fn build_share_invitation(
    base_url: &str,
    sc_no: ScheduleNo,
    host_id: &str,
    invitee_id: &str,
) -> EmailMessage {
    let link = share_confirm_link(base_url, sc_no, invitee_id);
    EmailMessage {
        recipient: invitee_id.to_string(),
        subject: format!("{host_id} invited you to a shared schedule"),
        body: format!("Open the link below to join the schedule.\n\n{link}\n"),
    }
}
