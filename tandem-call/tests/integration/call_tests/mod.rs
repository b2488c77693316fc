pub mod test_accept_swaps_offer_and_answer;
pub mod test_hangup_releases_both_sides;
pub mod test_media_flow_marks_callee_connected;
pub mod test_reject_leaves_room_intact;
