pub mod test_room_fills_and_frees_seats;
pub mod test_second_join_enables_calling;
