pub mod bid;
pub mod booking;
mod conversation;
pub mod listing;
mod notification;
mod support;
pub mod truck;

pub use bid::{
    expire_overdue_bids, reject_competing_bids, Bid, BidStatistics, BidTerms, DeliveryTime,
};
pub use booking::{Booking, BookingInput, BookingPatch, BookingStatistics};
pub use conversation::{Conversation, ConversationSummary, Message};
pub use listing::{CargoListing, ListingInput, ListingSummary};
pub use notification::{Kind as NotificationKind, Notification};
pub use support::{Article, ArticleInput, Faq, FaqInput, Service, ServiceInput};
pub use truck::{Truck, TruckInput, TruckType};

pub use bid::Status as BidStatus;
pub use booking::Status as BookingStatus;
pub use listing::Status as ListingStatus;
