pub mod model;

pub use model::{
    ClientMessage, CloseCode, DecodeError, JoinOutcome, ParseParticipantIdError, ParseRoomIdError,
    ParticipantId, RoomId, ServerMessage,
};
